/// Canonical field names
pub const FIELD_TIMESTAMP: &str = "timestamp";
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_SALINITY: &str = "salinity";
pub const FIELD_ODO: &str = "odo";
pub const FIELD_LATITUDE: &str = "latitude";
pub const FIELD_LONGITUDE: &str = "longitude";
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";

/// Known source-column spellings and the canonical field each maps to
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("Temperature (c)", FIELD_TEMPERATURE),
    ("Temperature", FIELD_TEMPERATURE),
    ("Salinity (ppt)", FIELD_SALINITY),
    ("Salinity", FIELD_SALINITY),
    ("ODO mg/L", FIELD_ODO),
    ("ODO", FIELD_ODO),
    ("Latitude", FIELD_LATITUDE),
    ("Longitude", FIELD_LONGITUDE),
    ("Date", FIELD_DATE),
    ("Time", FIELD_TIME),
];

/// Batch cleaning always uses a fixed z-score cut, independent of query-time `k`
pub const BATCH_ZSCORE_THRESHOLD: f64 = 3.0;

/// Query-time outlier defaults
pub const DEFAULT_OUTLIER_K: f64 = 1.5;
pub const DEFAULT_OUTLIER_FIELD: &str = FIELD_TEMPERATURE;

/// Pagination bounds
pub const DEFAULT_LIMIT: usize = 100;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 1000;
pub const DEFAULT_SKIP: usize = 0;
pub const MAX_SKIP: usize = 10_000_000;

/// Query parameter keys
pub const PARAM_START: &str = "start";
pub const PARAM_END: &str = "end";
pub const PARAM_MIN_TEMP: &str = "min_temp";
pub const PARAM_MAX_TEMP: &str = "max_temp";
pub const PARAM_MIN_SAL: &str = "min_sal";
pub const PARAM_MAX_SAL: &str = "max_sal";
pub const PARAM_MIN_ODO: &str = "min_odo";
pub const PARAM_MAX_ODO: &str = "max_odo";
pub const PARAM_LIMIT: &str = "limit";
pub const PARAM_SKIP: &str = "skip";
pub const PARAM_FIELD: &str = "field";
pub const PARAM_METHOD: &str = "method";
pub const PARAM_K: &str = "k";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_CLEANED_DIR: &str = "data/cleaned";
pub const DEFAULT_STORE_PATH: &str = "data/store/observations.jsonl";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const CONFIG_FILE_NAME: &str = "water-quality";
pub const ENV_PREFIX: &str = "WQ";
