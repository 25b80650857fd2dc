mod info;
mod shader;
