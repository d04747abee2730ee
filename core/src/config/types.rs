use serde::{Deserialize, Serialize};

/// Top-level config file; every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub debounce: DebounceConfig,

    #[serde(default)]
    pub weights: WeightsConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[classifier]`: rules turning raw samples into candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Audio RMS level above which a sample counts as speech.
    #[serde(default = "default_speech_threshold")]
    pub speech_threshold: f64,

    /// How long zero faces must persist before `FaceMissing` fires.
    #[serde(default = "default_face_grace_ms")]
    pub face_grace_ms: u64,

    /// Only fire `Speech` on the quiet -> loud transition.
    #[serde(default)]
    pub speech_edge_triggered: bool,

    /// Fire `FaceMissing` once per absence episode.
    #[serde(default)]
    pub latch_face_missing: bool,
}

fn default_speech_threshold() -> f64 {
    10.0
}

fn default_face_grace_ms() -> u64 {
    3_000
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            speech_threshold: default_speech_threshold(),
            face_grace_ms: default_face_grace_ms(),
            speech_edge_triggered: false,
            latch_face_missing: false,
        }
    }
}

/// `[debounce]`: re-fire windows and the activity-log throttle, in ms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// At most one activity-log line per window, any category.
    #[serde(default = "default_log_window_ms")]
    pub log_window_ms: u64,

    #[serde(default = "default_face_window_ms")]
    pub face_missing_ms: u64,

    #[serde(default = "default_face_window_ms")]
    pub multiple_faces_ms: u64,
}

fn default_log_window_ms() -> u64 {
    1_000
}

fn default_face_window_ms() -> u64 {
    5_000
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            log_window_ms: default_log_window_ms(),
            face_missing_ms: default_face_window_ms(),
            multiple_faces_ms: default_face_window_ms(),
        }
    }
}

/// `[weights]`: score deducted per occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_weight_one")]
    pub speech: f64,
    #[serde(default = "default_weight_one")]
    pub mouse_off_screen: f64,
    #[serde(default = "default_weight_one")]
    pub fullscreen_exit: f64,
    #[serde(default = "default_weight_two")]
    pub face_missing: f64,
    #[serde(default = "default_weight_two")]
    pub copy_action: f64,
    #[serde(default = "default_weight_three")]
    pub multiple_faces: f64,
}

fn default_weight_one() -> f64 {
    1.0
}

fn default_weight_two() -> f64 {
    2.0
}

fn default_weight_three() -> f64 {
    3.0
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            speech: default_weight_one(),
            mouse_off_screen: default_weight_one(),
            fullscreen_exit: default_weight_one(),
            face_missing: default_weight_two(),
            copy_action: default_weight_two(),
            multiple_faces: default_weight_three(),
        }
    }
}

/// `[persistence]`: snapshot store, activity log and writer queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// `~` and env vars are expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    #[serde(default = "default_activity_file")]
    pub activity_file: String,

    /// Per-writer queue depth; overflow is dropped and counted.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_data_dir() -> String {
    "logs".to_string()
}

fn default_snapshot_file() -> String {
    "trustScore.json".to_string()
}

fn default_activity_file() -> String {
    "activity.log".to_string()
}

fn default_channel_capacity() -> usize {
    256
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    100
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: default_snapshot_file(),
            activity_file: default_activity_file(),
            channel_capacity: default_channel_capacity(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// `[http_server]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty disables the file appender.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}
