mod canvas;
mod viewport;
