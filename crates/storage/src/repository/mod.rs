pub mod matches;
pub mod people;
pub mod seasons;

pub use matches::MatchRepository;
pub use people::PeopleRepository;
pub use seasons::SeasonRepository;
