//! Core DICOM types: data element tags, value representations, transfer
//! syntaxes, data element values, data sets, and the errors raised when
//! reading values out of them.

pub mod data_element_tag;
pub mod data_element_value;
pub mod data_error;
pub mod data_set;
pub mod dictionary;
pub mod error;
pub mod transfer_syntax;
pub mod value_representation;

pub use data_element_tag::DataElementTag;
pub use data_element_value::DataElementValue;
pub use data_error::DataError;
pub use data_set::DataSet;
pub use error::{Dcmb64Error, error_block, print_error_lines};
pub use transfer_syntax::TransferSyntax;
pub use value_representation::ValueRepresentation;
