//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 상태에서의 호출은 아무 동작도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `hoist_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(hoist_core::metrics::FRAMES_DECODED_TOTAL).increment(3);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 이상 유형 레이블 키 (short_chunk, truncated_payload, trailing_bytes)
pub const LABEL_ANOMALY: &str = "anomaly";

// ─── Frame Decoder 메트릭 ───────────────────────────────────────────

/// 디코딩된 전체 프레임 수 (counter)
pub const FRAMES_DECODED_TOTAL: &str = "hoist_frames_decoded_total";

/// 디코딩 이상 발생 수 (counter, label: anomaly)
pub const FRAME_ANOMALIES_TOTAL: &str = "hoist_frame_anomalies_total";

// ─── Lifecycle 메트릭 ───────────────────────────────────────────────

/// 임시 컨테이너 실행 수 (counter, label: result)
pub const TEMPORARY_RUNS_TOTAL: &str = "hoist_temporary_runs_total";

/// 임시 컨테이너 정리 실패 수 (counter)
pub const CLEANUP_FAILURES_TOTAL: &str = "hoist_cleanup_failures_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        FRAMES_DECODED_TOTAL,
        "Total multiplexed output frames decoded"
    );
    describe_counter!(
        FRAME_ANOMALIES_TOTAL,
        "Malformed or partially consumed output chunks"
    );
    describe_counter!(
        TEMPORARY_RUNS_TOTAL,
        "Temporary container runs by result"
    );
    describe_counter!(
        CLEANUP_FAILURES_TOTAL,
        "Temporary container removals that failed after the run answered"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        FRAMES_DECODED_TOTAL,
        FRAME_ANOMALIES_TOTAL,
        TEMPORARY_RUNS_TOTAL,
        CLEANUP_FAILURES_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_hoist_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("hoist_"),
                "Metric '{}' does not start with 'hoist_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES {
            assert!(name.ends_with("_total"), "counter '{name}' lacks _total");
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더가 없어도 패닉하지 않아야 함
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_RESULT, LABEL_ANOMALY] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
