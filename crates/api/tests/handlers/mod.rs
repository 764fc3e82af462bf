mod booking_test;
mod free_schedule_test;
mod info_test;
