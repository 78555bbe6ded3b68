// HRMS core
//
// Request-level orchestration on top of hrms-store: the table browsing
// gateway and the fixed-schema employee directory.

pub mod directory;
pub mod gateway;

pub use directory::{
    AttendanceDay, EmployeeDirectory, EmployeeProfile, Task, ATTENDANCE_DAYS, MAX_USERNAME_LEN,
};
pub use gateway::{QueryGateway, RequestStage};
