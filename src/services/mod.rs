pub mod auto_translate;
pub mod catalog;
pub mod context;
pub mod coordinator;
pub mod draft;
pub mod locale_search;
pub mod locks;
pub mod provider;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod worker;
