pub mod billing_cycles;
pub mod renewal_urgencies;
pub mod sort_order;
pub mod subscription_sort_keys;
pub mod subscription_statuses;
pub mod user_statuses;
