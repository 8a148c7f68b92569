pub mod cache;
pub mod clock;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod loader;
pub mod sanitize;
pub mod source;
pub mod storage;
pub mod types;
pub mod username;

pub use cache::{CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL, ProfileCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::ProfileController;
pub use error::{ProfileError, ProfileErrorKind};
pub use loader::{PendingLoad, ProfileLoader};
pub use sanitize::sanitize_profile;
pub use source::{GithubHttpSource, ProfileSource};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use types::{
    CachedProfileEntry, FetchStatus, GithubProfile, LoadOutcome, ProfileOrigin, ProfileView,
};
pub use username::Username;
