pub mod terminal_bell_sink;
