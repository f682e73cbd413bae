pub const BACKEND_ORIGIN: &str = "http://localhost:5000";
pub const AVATAR_UPLOAD_PATH: &str = "/uploads/avatars/";
pub const PLACEHOLDER_SERVICE_URL: &str = "https://ui-avatars.com/api/";

pub const FLAGGED_CONTENT_WARNING: &str = "Your message contains inappropriate language. Please revise it before sending.";
pub const FLAGGED_TERMS_PREFIX: &str = "Flagged terms: ";
