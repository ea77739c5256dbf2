pub mod network {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    pub const MIN_TIMEOUT_SECONDS: u64 = 1;
    pub const MAX_TIMEOUT_SECONDS: u64 = 600;
    pub const MAX_REDIRECTS: usize = 10;
    pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
    pub const USER_AGENT: &str = concat!("apiprobe/", env!("CARGO_PKG_VERSION"));
}

pub mod http {
    pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
    pub const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH"];
}

pub mod limits {
    pub const BODY_PREVIEW_CHARS: usize = 100;
    pub const REGEX_CACHE_CAPACITY: usize = 256;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
