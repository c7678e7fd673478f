pub mod complete_past_bookings;
