mod habits;
mod sessions;
mod tasks;
