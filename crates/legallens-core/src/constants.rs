/// Base URL used when neither the command line nor the config names a server.
pub const DEFAULT_ADDR: &str = "http://localhost:8000";

pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const REFRESH: &str = "/auth/refresh";
    pub const ME: &str = "/users/me";
    pub const DOCUMENTS: &str = "/documents";
    pub const UPLOAD: &str = "/document/upload";
    pub const CHAT: &str = "/ai/chat";

    pub fn document(id: i64) -> String {
        format!("/document/{id}")
    }
}

/// Fixed keys under which the credential pair is persisted.
pub mod storage_keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
}
