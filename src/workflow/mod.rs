pub mod genticket;
