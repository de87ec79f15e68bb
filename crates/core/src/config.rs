//! 설정 관리: hoist.toml 파싱 및 런타임 설정
//!
//! [`HoistConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HOIST_DOCKER_SOCKET=/run/docker.sock` 형식)
//! 3. 설정 파일 (`hoist.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), hoist_core::error::HoistError> {
//! use hoist_core::config::HoistConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HoistConfig::load("hoist.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HoistConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, HoistError};

/// 설정 상한값 상수
const MAX_CONNECT_TIMEOUT_SECS: u64 = 3600;
const MAX_CONCURRENT_INSPECTIONS: usize = 256;

/// hoist 통합 설정
///
/// `hoist.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoistConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Docker 엔진 연결 설정
    #[serde(default)]
    pub docker: DockerConfig,
}

impl HoistConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HoistError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값으로 대체하여 로드합니다.
    ///
    /// 파일이 존재하지만 파싱/검증에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HoistError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(HoistError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HoistError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HoistError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HoistError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HoistError> {
        toml::from_str(toml_str).map_err(|e| {
            HoistError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HOIST_{SECTION}_{FIELD}`
    /// 예: `HOIST_DOCKER_SOCKET=/run/docker.sock`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HOIST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HOIST_GENERAL_LOG_FORMAT");

        // Docker
        override_string(&mut self.docker.socket, "HOIST_DOCKER_SOCKET");
        override_u64(
            &mut self.docker.connect_timeout_secs,
            "HOIST_DOCKER_CONNECT_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.docker.max_concurrent_inspections,
            "HOIST_DOCKER_MAX_CONCURRENT_INSPECTIONS",
        );
        override_optional_string(&mut self.docker.hostname, "HOIST_DOCKER_HOSTNAME");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HoistError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.docker.socket.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "docker.socket".to_owned(),
                reason: "socket must not be empty".to_owned(),
            }
            .into());
        }

        if self.docker.connect_timeout_secs == 0
            || self.docker.connect_timeout_secs > MAX_CONNECT_TIMEOUT_SECS
        {
            return Err(ConfigError::InvalidValue {
                field: "docker.connect_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_CONNECT_TIMEOUT_SECS}"),
            }
            .into());
        }

        if self.docker.max_concurrent_inspections == 0
            || self.docker.max_concurrent_inspections > MAX_CONCURRENT_INSPECTIONS
        {
            return Err(ConfigError::InvalidValue {
                field: "docker.max_concurrent_inspections".to_owned(),
                reason: format!("must be 1-{MAX_CONCURRENT_INSPECTIONS}"),
            }
            .into());
        }

        if self.docker.hostname.as_deref() == Some("") {
            return Err(ConfigError::InvalidValue {
                field: "docker.hostname".to_owned(),
                reason: "hostname override must not be empty; omit it instead".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Docker 엔진 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker 소켓 경로
    pub socket: String,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 네트워크 소속 검색 시 동시 inspect 호출 최대 수
    pub max_concurrent_inspections: usize,
    /// 자기 컨테이너 검색에 사용할 호스트명 (미지정 시 OS 호스트명)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: "/var/run/docker.sock".to_owned(),
            connect_timeout_secs: 120,
            max_concurrent_inspections: 16,
            hostname: None,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_optional_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val);
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
