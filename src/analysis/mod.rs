//! Analysis layer: turns a request plus a filtered dataset into a
//! self-contained result for the presentation layer.
//!
//! The route is chosen from the roles of the selected columns and the view
//! mode only:
//!
//! | columns               | Table / Statistics               | Visualization |
//! |-----------------------|----------------------------------|---------------|
//! | numeric               | summary                          | histogram     |
//! | categorical           | frequency table                  | bar chart     |
//! | numeric × numeric     | summary pair, or grouped summary | scatter       |
//! | categorical × categorical | cross tab                    | heat map      |
//! | numeric × categorical | grouped summary                  | box plot      |

pub mod dispatch;
pub mod request;
pub mod result;
pub mod stats;
