pub mod download;
pub mod file;
pub mod profile;
pub mod session;
pub mod upload;
pub mod user;

pub use file::{FileInfo, FileMetadata, UploadResponse};
pub use user::{AuthResponse, LoginForm, RegisterForm, User, UserProfile};
