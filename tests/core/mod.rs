mod deadline;
mod format_output_dir;
mod mirror_remote;
