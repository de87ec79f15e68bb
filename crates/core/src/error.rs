//! 에러 타입: 최상위 에러 및 설정 에러 정의

/// hoist 최상위 에러 타입
///
/// 도메인 크레이트의 에러는 `From` 구현을 통해 이 타입으로 변환되어
/// 상위 레이어에서 `?` 연산자로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum HoistError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 컨테이너 엔진 호출 에러
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_via_from() {
        let err: HoistError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            HoistError::Config(ConfigError::ParseFailed { .. })
        ));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn invalid_value_display_includes_field() {
        let err = ConfigError::InvalidValue {
            field: "docker.socket".to_owned(),
            reason: "must not be empty".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker.socket"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: HoistError = io.into();
        assert!(matches!(err, HoistError::Io(_)));
    }

    #[test]
    fn engine_error_display() {
        let err = HoistError::Engine("no such container: abc".to_owned());
        assert_eq!(err.to_string(), "engine error: no such container: abc");
    }
}
