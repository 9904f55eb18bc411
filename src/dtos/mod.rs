pub mod ticketdtos;
