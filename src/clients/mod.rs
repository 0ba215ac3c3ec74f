pub mod findsgjobs;
