pub mod agents;
pub mod ask;
pub mod doctor;
