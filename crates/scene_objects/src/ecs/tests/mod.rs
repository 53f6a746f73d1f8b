//! Frame-level scenarios for the entity manager

mod frame_scenarios;
