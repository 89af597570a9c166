pub mod byte_stream;
pub mod data_element_header;
pub mod value_length;
