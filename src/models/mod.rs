pub mod flight;
pub mod reference;

pub use flight::{
    AirlineRef, AirportRef, FlightDetail, FlightId, FlightPage, FlightPatch, FlightPayload,
    FlightSummary, MutationResponse, ServerStatus,
};
pub use reference::{Airline, AirlineList, Airport, AirportList, Plane, PlaneList, ReferenceData};
