//! Example site built on Trellis.
//!
//! Everything the site consists of is wired explicitly: one component
//! ([`pages::PagesComponent`]) carrying routes, controllers, and a
//! capability; one plugin ([`trace::TracePlugin`]) observing the
//! lifecycle through hooks; and the inline view templates in [`views`].

pub mod pages;
pub mod trace;
pub mod views;
