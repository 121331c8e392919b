pub mod activity_log;

pub use activity_log::{
    ActivityLogHandle, ActivityLogPane, ActivityLogWriter, global_activity_log,
    set_global_activity_log,
};
