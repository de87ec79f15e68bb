//! hoist 공통 크레이트
//!
//! 모든 hoist 크레이트가 공유하는 설정, 최상위 에러 타입, 메트릭 이름을 정의합니다.
//!
//! - [`config`]: `hoist.toml` 로딩 및 환경변수 오버라이드 (`HoistConfig`)
//! - [`error`]: 최상위 에러 (`HoistError`, `ConfigError`)
//! - [`metrics`]: `metrics::counter!()` 에 사용하는 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, HoistError};

// 설정
pub use config::{DockerConfig, GeneralConfig, HoistConfig};
