pub mod avatar;
pub mod constants;
pub mod moderation;

pub use avatar::{derive_for_role, derive_generic, resolve_avatar_url, AvatarDescriptor, UserInfo};
pub use moderation::{ContentScanner, MatchMode, ScanOutcome};
