// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External collaborators: weather, geocoding and the remote advisor.

pub mod advisor;
pub mod geocoding;
pub mod weather;

pub use advisor::GeminiAdvisor;
pub use geocoding::GeocodingClient;
pub use weather::WeatherClient;
