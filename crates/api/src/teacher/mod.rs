//! Teacher portal endpoints. Paths under `/api/v1/t/` carry the teacher token.

pub mod auth;
pub mod classes;

pub use auth::{TEACHER_TOKEN_KEY, TeacherProfile};
pub use classes::{AttendanceExport, ClassBrief, StudentBrief, UploadedFile};
