mod repository;

pub use repository::InMemoryContentRepository;
