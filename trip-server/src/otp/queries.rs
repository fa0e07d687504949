//! GraphQL documents sent to the routing endpoint.
//!
//! Variables line up with [`super::types::PlanVariables`]. Optional
//! variables (`triangle`, `allowedTicketTypes`, `intermediatePlaces`)
//! are declared nullable so they can be omitted from the variables
//! object entirely.

/// Plan query: one variant's itineraries for a search.
pub const PLAN_QUERY: &str = r#"
query Plan(
  $fromPlace: String!
  $toPlace: String!
  $intermediatePlaces: [InputCoordinates]
  $date: String!
  $time: String!
  $arriveBy: Boolean!
  $numItineraries: Int!
  $wheelchair: Boolean!
  $walkReluctance: Float!
  $walkBoardCost: Int!
  $minTransferTime: Int!
  $transferPenalty: Int!
  $walkSpeed: Float!
  $bikeSpeed: Float!
  $optimize: OptimizeType!
  $triangle: InputTriangle
  $allowedTicketTypes: [String]
  $itineraryFiltering: Float!
  $locale: String!
  $transportModes: [TransportMode!]
  $disableRemainingWeightHeuristic: Boolean!
) {
  plan(
    fromPlace: $fromPlace
    toPlace: $toPlace
    intermediatePlaces: $intermediatePlaces
    date: $date
    time: $time
    arriveBy: $arriveBy
    numItineraries: $numItineraries
    wheelchair: $wheelchair
    walkReluctance: $walkReluctance
    walkBoardCost: $walkBoardCost
    minTransferTime: $minTransferTime
    transferPenalty: $transferPenalty
    walkSpeed: $walkSpeed
    bikeSpeed: $bikeSpeed
    optimize: $optimize
    triangle: $triangle
    allowedTicketTypes: $allowedTicketTypes
    itineraryFiltering: $itineraryFiltering
    locale: $locale
    transportModes: $transportModes
    disableRemainingWeightHeuristic: $disableRemainingWeightHeuristic
  ) {
    date
    itineraries {
      startTime
      endTime
      duration
      walkDistance
      legs {
        mode
        rentedBike
        startTime
        endTime
        distance
        realtimeState
        from {
          name
          lat
          lon
        }
        to {
          name
          lat
          lon
        }
        route {
          gtfsId
          shortName
        }
        trip {
          gtfsId
          directionId
          stoptimesForDate {
            scheduledDeparture
          }
        }
        legGeometry {
          length
          points
        }
      }
    }
  }
}
"#;

/// Span of dates the endpoint's timetable data covers.
pub const SERVICE_TIME_RANGE_QUERY: &str = r#"
query ServiceTimeRange {
  serviceTimeRange {
    start
    end
  }
}
"#;
