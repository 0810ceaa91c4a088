// handlers/protected/mod.rs - Endpoints for signed-in trainers
//
// Every handler takes a `TrainerUser`, so the token is verified here even though
// the gate only checks that a trainer token is present for UI pages.
pub mod trainer_members;
