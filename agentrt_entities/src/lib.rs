pub mod conversation_events;
