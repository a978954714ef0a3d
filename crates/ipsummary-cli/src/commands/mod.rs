//! Command implementations

mod aggregate;
mod export_db;
mod move_record;
mod run;
mod task;

pub use aggregate::execute_aggregate;
pub use export_db::execute_export_db;
pub use move_record::execute_move;
pub use run::execute_run;
pub use task::execute_task;
