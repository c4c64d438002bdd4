pub mod bucket_cleanup;
pub mod bucket_notification;
pub mod crawler_init;
pub mod resource_notification;
