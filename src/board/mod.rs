pub mod fen;

pub use fen::{decode_placement, encode_placement, Decoder, FenDecoder, BOARD_TENSOR_LEN, SQUARE_CLASSES};
