pub mod tender;

pub use tender::{
    FileRef, NewTender, ReferencedFilesResponse, Tender, TenderChanges, TenderDeletedResponse,
    TenderResponse, TenderStatus,
};
