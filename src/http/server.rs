use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::{
    config::HttpConfig,
    domain::track::{TrackId, TrackInput, TrackPatch},
    http::error::ApiError,
    service::TrackService,
};

pub struct HttpServer {
    service: TrackService,
    pub config: HttpConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl HttpServer {
    pub fn new(service: TrackService, config: HttpConfig) -> Self {
        Self { service, config }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/) => {
                Response::json(&MessageResponse::new("Music Library API is running"))
            },
            (GET) (/api/tracks) => {
                Self::respond(self.list_tracks())
            },
            (POST) (/api/tracks) => {
                Self::respond(self.create_track(request))
            },
            (GET) (/api/tracks/{id: TrackId}) => {
                Self::respond(self.get_track(id))
            },
            (PUT) (/api/tracks/{id: TrackId}) => {
                Self::respond(self.update_track(id, request))
            },
            (DELETE) (/api/tracks/{id: TrackId}) => {
                Self::respond(self.delete_track(id))
            },
            _ => ApiError::NotFound("route not found".into()).into_response()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn respond(result: Result<Response, ApiError>) -> Response {
        result.unwrap_or_else(ApiError::into_response)
    }

    fn list_tracks(&self) -> Result<Response, ApiError> {
        let tracks = self.service.list_tracks()?;
        Ok(Response::json(&tracks))
    }

    fn get_track(&self, id: TrackId) -> Result<Response, ApiError> {
        let track = self.service.get_track(id)?;
        Ok(Response::json(&track))
    }

    fn create_track(&self, request: &Request) -> Result<Response, ApiError> {
        let input: TrackInput = rouille::input::json_input(request)?;
        let track = self.service.create_track(input)?;
        info!("created track {}", track.track_id);
        Ok(Response::json(&track).with_status_code(201))
    }

    fn update_track(&self, id: TrackId, request: &Request) -> Result<Response, ApiError> {
        let patch: TrackPatch = rouille::input::json_input(request)?;
        let track = self.service.update_track(id, patch)?;
        Ok(Response::json(&track))
    }

    fn delete_track(&self, id: TrackId) -> Result<Response, ApiError> {
        let deleted = self.service.delete_track(id)?;
        Ok(Response::json(&MessageResponse::new(format!(
            "Track {deleted} deleted"
        ))))
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
