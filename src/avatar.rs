use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::constants::{AVATAR_UPLOAD_PATH, BACKEND_ORIGIN, PLACEHOLDER_SERVICE_URL};

/// Fixed palette indexed by the name hash. The order is part of the contract:
/// reordering would change every existing user's color.
pub const AVATAR_PALETTE: [&str; 12] = [
    "#F44336", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5", "#2196F3",
    "#009688", "#4CAF50", "#FF9800", "#FF5722", "#795548", "#607D8B",
];

pub const ADMIN_AVATAR_COLOR: &str = "#6B46C1";
pub const UNKNOWN_AVATAR_COLOR: &str = "#9E9E9E";

/// Read-only snapshot of a user record, as the UI collaborators hold it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
}

/// Derived visual identity for one user. Recomputed on every call; the same
/// name always produces the same color and initials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarDescriptor {
    pub color: String,
    pub initials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub fallback_url: String,
}

/// Derives the avatar descriptor for a user, honoring role overrides.
/// Absent user yields the fixed unknown-user descriptor; admins get the fixed
/// admin color and an "Admin" placeholder; everyone else goes through
/// `derive_generic`.
pub fn derive_for_role(user: Option<&UserInfo>) -> AvatarDescriptor {
    match user {
        None => AvatarDescriptor {
            color: UNKNOWN_AVATAR_COLOR.to_string(),
            initials: "?".to_string(),
            image_url: None,
            fallback_url: placeholder_url("User", UNKNOWN_AVATAR_COLOR),
        },
        Some(user) if user.role.as_deref() == Some("admin") => AvatarDescriptor {
            color: ADMIN_AVATAR_COLOR.to_string(),
            initials: user
                .name
                .as_deref()
                .and_then(|name| name.chars().next())
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_else(|| "A".to_string()),
            image_url: user.avatar.clone(),
            fallback_url: placeholder_url("Admin", ADMIN_AVATAR_COLOR),
        },
        Some(user) => derive_generic(user),
    }
}

/// Hash-based derivation for regular users. The color comes from the fixed
/// palette indexed by the name hash, the initials from the first character of
/// each name part.
pub fn derive_generic(user: &UserInfo) -> AvatarDescriptor {
    let name = user.name.as_deref().unwrap_or("User");
    let color = AVATAR_PALETTE[(name_hash(name) % AVATAR_PALETTE.len() as u32) as usize];
    let initials = match user.name.as_deref() {
        Some(name) => {
            let initials = initials_for(name);
            if initials.is_empty() {
                "?".to_string()
            } else {
                initials
            }
        }
        None => "?".to_string(),
    };
    AvatarDescriptor {
        color: color.to_string(),
        initials,
        image_url: user.avatar.clone(),
        fallback_url: placeholder_url(name, color),
    }
}

/// Normalizes the raw `avatar` field into a fully qualified URL against the
/// default backend origin. Returns `None` when the user or the field is
/// absent.
pub fn resolve_avatar_url(user: Option<&UserInfo>) -> Option<String> {
    resolve_avatar_url_with_origin(user, BACKEND_ORIGIN)
}

/// Same as `resolve_avatar_url` but against a caller-supplied origin, for
/// deployments where the backend base URL comes from the environment.
///
/// Rewrite rules, first match wins:
/// absolute http(s) URLs and data URIs pass through unchanged;
/// `/public/uploads/…` and `/public/…` drop the `/public` prefix;
/// `uploads/…` and `/uploads/…` are joined to the origin;
/// `/avatars/…` moves under `/uploads`;
/// a bare filename lands under the avatars upload path;
/// any other relative path is joined to the origin.
pub fn resolve_avatar_url_with_origin(user: Option<&UserInfo>, origin: &str) -> Option<String> {
    let raw = user?.avatar.as_deref()?;
    if raw.is_empty() {
        return None;
    }
    let origin = origin.trim_end_matches('/');
    let resolved = if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("data:") {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("/public/uploads/") {
        format!("{origin}/uploads/{rest}")
    } else if raw.starts_with("uploads/") {
        format!("{origin}/{raw}")
    } else if raw.starts_with("/uploads/") {
        format!("{origin}{raw}")
    } else if raw.starts_with("/avatars/") {
        format!("{origin}/uploads{raw}")
    } else if let Some(rest) = raw.strip_prefix("/public/") {
        format!("{origin}/{rest}")
    } else if !raw.contains('/') {
        format!("{origin}{AVATAR_UPLOAD_PATH}{raw}")
    } else {
        format!("{origin}/{}", raw.trim_start_matches('/'))
    };
    Some(resolved)
}

// Rolling hash over UTF-16 code units: hash = hash * 31 + unit, expressed as
// (hash << 5) - hash, on wrapping 32-bit signed arithmetic, absolute value at
// the end. Existing users keep their colors only if this stays bit-exact.
fn name_hash(name: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in name.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs()
}

fn initials_for(name: &str) -> String {
    let firsts: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect();
    firsts.to_uppercase().chars().take(2).collect()
}

fn placeholder_url(name: &str, color: &str) -> String {
    format!(
        "{PLACEHOLDER_SERVICE_URL}?name={}&background={}&color=fff",
        utf8_percent_encode(name, NON_ALPHANUMERIC),
        color.trim_start_matches('#'),
    )
}
