pub mod wait_timer;
