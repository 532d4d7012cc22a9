pub mod batch;
pub mod ignore;
pub mod row;
