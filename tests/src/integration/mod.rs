//! Integration scenarios spanning every gateway subsystem.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod e2e_chaincode;

#[cfg(test)]
mod lifecycle;

#[cfg(test)]
mod properties;
