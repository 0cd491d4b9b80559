pub mod job_writer;
