pub mod message;
pub mod ticket;
pub mod user;

pub use message::{Message, MessageType, Participant};
pub use ticket::{Ticket, TicketStatus, UserRef};
pub use user::{Role, User};
