mod chown;
mod scenario;
mod set_id;
