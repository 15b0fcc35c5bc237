mod config;
mod registry;
mod replica;
mod resolver;
mod serializer;
mod store;
