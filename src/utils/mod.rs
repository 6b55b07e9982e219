pub mod column_pool;
pub mod file_interaction_local_and_cloud;
