mod concurrency;
mod delivery;
mod discovery;
mod end_to_end;
mod helpers;
mod lifecycle;
